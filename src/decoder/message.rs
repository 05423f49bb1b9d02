// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use crate::fix::tags;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Which way a message travelled relative to the process that wrote the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => write!(f, "IN"),
            Direction::Outgoing => write!(f, "OUT"),
        }
    }
}

/// MsgType (35) values the audit core distinguishes.  Anything else keeps
/// its raw code in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum MessageType {
    Heartbeat,
    TestRequest,
    ResendRequest,
    Reject,
    SequenceReset,
    Logout,
    Logon,
    ExecutionReport,
    OrderCancelReject,
    NewOrderSingle,
    OrderCancelRequest,
    OrderCancelReplaceRequest,
    Other(String),
}

impl MessageType {
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => MessageType::Heartbeat,
            "1" => MessageType::TestRequest,
            "2" => MessageType::ResendRequest,
            "3" => MessageType::Reject,
            "4" => MessageType::SequenceReset,
            "5" => MessageType::Logout,
            "A" => MessageType::Logon,
            "8" => MessageType::ExecutionReport,
            "9" => MessageType::OrderCancelReject,
            "D" => MessageType::NewOrderSingle,
            "F" => MessageType::OrderCancelRequest,
            "G" => MessageType::OrderCancelReplaceRequest,
            other => MessageType::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            MessageType::Heartbeat => "0",
            MessageType::TestRequest => "1",
            MessageType::ResendRequest => "2",
            MessageType::Reject => "3",
            MessageType::SequenceReset => "4",
            MessageType::Logout => "5",
            MessageType::Logon => "A",
            MessageType::ExecutionReport => "8",
            MessageType::OrderCancelReject => "9",
            MessageType::NewOrderSingle => "D",
            MessageType::OrderCancelRequest => "F",
            MessageType::OrderCancelReplaceRequest => "G",
            MessageType::Other(code) => code,
        }
    }

    /// Messages that take part in order lineage.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            MessageType::NewOrderSingle
                | MessageType::OrderCancelReplaceRequest
                | MessageType::OrderCancelRequest
                | MessageType::ExecutionReport
        )
    }

    /// Replace and cancel requests, the two messages that link a new ClOrdID to an older one.
    pub fn links_lineage(&self) -> bool {
        matches!(
            self,
            MessageType::OrderCancelReplaceRequest | MessageType::OrderCancelRequest
        )
    }
}

/// One decoded tag with its readable name and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedField {
    pub tag: u32,
    pub name: String,
    pub raw: String,
    pub decoded: String,
}

/// A field whose tag number does not fit a `u32`, named `Tag_<digits>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OversizedField {
    pub name: String,
    pub raw: String,
}

/// A FIX message recovered from one log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedMessage {
    pub sequence: usize,
    pub line_number: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub direction: Option<Direction>,
    pub connection: Option<String>,
    pub thread: Option<String>,
    pub msg_type: Option<MessageType>,
    pub msg_type_label: Option<String>,
    pub fields: BTreeMap<u32, DecodedField>,
    pub repeated: Vec<DecodedField>,
    pub oversized: Vec<OversizedField>,
    pub raw: String,
}

impl DecodedMessage {
    /// Raw value of a tag.
    pub fn value(&self, tag: u32) -> Option<&str> {
        self.fields.get(&tag).map(|f| f.raw.as_str())
    }

    /// Raw value, treating empty strings as absent.
    pub fn non_empty(&self, tag: u32) -> Option<&str> {
        self.value(tag).filter(|v| !v.is_empty())
    }

    /// Table-decoded value of a tag.
    pub fn decoded(&self, tag: u32) -> Option<&str> {
        self.fields.get(&tag).map(|f| f.decoded.as_str())
    }

    /// Numeric value of a tag; absent or unparseable values yield `None`.
    pub fn number(&self, tag: u32) -> Option<f64> {
        self.value(tag)?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub fn is(&self, kind: &MessageType) -> bool {
        self.msg_type.as_ref() == Some(kind)
    }

    /// Field name → decoded value pairs in tag order, including repeated
    /// occurrences; oversized tags come last.
    pub fn named_values(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<&DecodedField> = self.fields.values().collect();
        out.extend(self.repeated.iter());
        out.sort_by_key(|f| f.tag);
        out.into_iter()
            .map(|f| (f.name.as_str(), f.decoded.as_str()))
            .chain(self.oversized.iter().map(|f| (f.name.as_str(), f.raw.as_str())))
            .collect()
    }

    pub fn order_event(&self) -> OrderEvent<'_> {
        OrderEvent { message: self }
    }
}

/// Order-lifecycle view over a decoded message.  Nothing is copied; each
/// accessor reads the underlying field on demand.
#[derive(Debug, Clone, Copy)]
pub struct OrderEvent<'a> {
    message: &'a DecodedMessage,
}

impl<'a> OrderEvent<'a> {
    pub fn cl_ord_id(&self) -> Option<&'a str> {
        self.message.non_empty(tags::CL_ORD_ID)
    }

    pub fn orig_cl_ord_id(&self) -> Option<&'a str> {
        self.message.non_empty(tags::ORIG_CL_ORD_ID)
    }

    pub fn order_id(&self) -> Option<&'a str> {
        self.message.non_empty(tags::ORDER_ID)
    }

    pub fn order_qty(&self) -> Option<f64> {
        self.message.number(tags::ORDER_QTY)
    }

    pub fn cum_qty(&self) -> Option<f64> {
        self.message.number(tags::CUM_QTY)
    }

    pub fn leaves_qty(&self) -> Option<f64> {
        self.message.number(tags::LEAVES_QTY)
    }

    pub fn last_qty(&self) -> Option<f64> {
        self.message.number(tags::LAST_QTY)
    }

    pub fn last_px(&self) -> Option<f64> {
        self.message.number(tags::LAST_PX)
    }

    pub fn avg_px(&self) -> Option<f64> {
        self.message.number(tags::AVG_PX)
    }

    pub fn ord_status(&self) -> Option<&'a str> {
        self.message.decoded(tags::ORD_STATUS)
    }

    pub fn exec_type(&self) -> Option<&'a str> {
        self.message.decoded(tags::EXEC_TYPE)
    }

    pub fn symbol(&self) -> Option<&'a str> {
        self.message.non_empty(tags::SYMBOL)
    }

    pub fn side(&self) -> Option<&'a str> {
        self.message
            .decoded(tags::SIDE)
            .filter(|s| !s.is_empty())
    }

    pub fn last_market(&self) -> Option<&'a str> {
        self.message
            .value(tags::LAST_MKT)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
