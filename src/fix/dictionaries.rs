// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools
//
// Built-in FIX 4.2/4.4 field names and enumerations used by the audit decoder.

use super::tags;

pub(super) const FIELD_NAMES: &[(u32, &str)] = &[
    (1, "Account"),
    (6, "AvgPx"),
    (7, "BeginSeqNo"),
    (8, "BeginString"),
    (9, "BodyLength"),
    (10, "CheckSum"),
    (11, "ClOrdID"),
    (14, "CumQty"),
    (15, "Currency"),
    (16, "EndSeqNo"),
    (17, "ExecID"),
    (18, "ExecInst"),
    (19, "ExecRefID"),
    (20, "ExecTransType"),
    (21, "HandlInst"),
    (22, "SecurityIDSource"),
    (30, "LastMkt"),
    (31, "LastPx"),
    (32, "LastQty"),
    (34, "MsgSeqNum"),
    (35, "MsgType"),
    (36, "NewSeqNo"),
    (37, "OrderID"),
    (38, "OrderQty"),
    (39, "OrdStatus"),
    (40, "OrdType"),
    (41, "OrigClOrdID"),
    (43, "PossDupFlag"),
    (44, "Price"),
    (45, "RefSeqNum"),
    (47, "Rule80A"),
    (48, "SecurityID"),
    (49, "SenderCompID"),
    (50, "SenderSubID"),
    (52, "SendingTime"),
    (54, "Side"),
    (55, "Symbol"),
    (56, "TargetCompID"),
    (57, "TargetSubID"),
    (58, "Text"),
    (59, "TimeInForce"),
    (60, "TransactTime"),
    (63, "SettlType"),
    (64, "SettlDate"),
    (75, "TradeDate"),
    (76, "ExecBroker"),
    (97, "PossResend"),
    (98, "EncryptMethod"),
    (99, "StopPx"),
    (100, "ExDestination"),
    (102, "CxlRejReason"),
    (103, "OrdRejReason"),
    (108, "HeartBtInt"),
    (109, "ClientID"),
    (110, "MinQty"),
    (111, "MaxFloor"),
    (112, "TestReqID"),
    (115, "OnBehalfOfCompID"),
    (122, "OrigSendingTime"),
    (123, "GapFillFlag"),
    (126, "ExpireTime"),
    (128, "DeliverToCompID"),
    (141, "ResetSeqNumFlag"),
    (150, "ExecType"),
    (151, "LeavesQty"),
    (167, "SecurityType"),
    (207, "SecurityExchange"),
    (336, "TradingSessionID"),
    (371, "RefTagID"),
    (372, "RefMsgType"),
    (373, "SessionRejectReason"),
    (434, "CxlRejResponseTo"),
    (526, "SecondaryClOrdID"),
    (528, "OrderCapacity"),
    (847, "TargetStrategy"),
    (851, "LastLiquidityInd"),
];

const MSG_TYPES: &[(&str, &str)] = &[
    ("0", "Heartbeat"),
    ("1", "Test Request"),
    ("2", "Resend Request"),
    ("3", "Reject"),
    ("4", "Sequence Reset"),
    ("5", "Logout"),
    ("8", "Execution Report"),
    ("9", "Order Cancel Reject"),
    ("A", "Logon"),
    ("D", "New Order Single"),
    ("E", "New Order List"),
    ("F", "Order Cancel Request"),
    ("G", "Order Cancel/Replace Request"),
    ("H", "Order Status Request"),
    ("Q", "Dont Know Trade"),
    ("j", "Business Message Reject"),
    ("AE", "Trade Capture Report"),
];

const ORD_STATUS: &[(&str, &str)] = &[
    ("0", "New"),
    ("1", "Partially Filled"),
    ("2", "Filled"),
    ("3", "Done for Day"),
    ("4", "Canceled"),
    ("5", "Replaced"),
    ("6", "Pending Cancel"),
    ("7", "Stopped"),
    ("8", "Rejected"),
    ("9", "Suspended"),
    ("A", "Pending New"),
    ("B", "Calculated"),
    ("C", "Expired"),
    ("D", "Accepted for Bidding"),
    ("E", "Pending Replace"),
];

const EXEC_TYPE: &[(&str, &str)] = &[
    ("0", "New"),
    ("1", "Partially Filled"),
    ("2", "Filled"),
    ("3", "Done for Day"),
    ("4", "Canceled"),
    ("5", "Replaced"),
    ("6", "Pending Cancel"),
    ("7", "Stopped"),
    ("8", "Rejected"),
    ("9", "Suspended"),
    ("A", "Pending New"),
    ("B", "Calculated"),
    ("C", "Expired"),
    ("D", "Restated"),
    ("E", "Pending Replace"),
    ("F", "Trade"),
    ("G", "Trade Correct"),
    ("H", "Trade Cancel"),
    ("I", "Order Status"),
];

const SIDE: &[(&str, &str)] = &[("1", "Buy"), ("2", "Sell")];

const ORD_TYPE: &[(&str, &str)] = &[
    ("1", "Market"),
    ("2", "Limit"),
    ("3", "Stop"),
    ("4", "Stop Limit"),
    ("P", "Pegged"),
];

const TIME_IN_FORCE: &[(&str, &str)] = &[
    ("0", "Day"),
    ("1", "Good Till Cancel"),
    ("2", "At the Opening"),
    ("3", "Immediate or Cancel"),
    ("4", "Fill or Kill"),
    ("6", "Good Till Date"),
    ("7", "At the Close"),
];

/// Enumerated fields decoded by default, keyed by tag.
pub(super) const VALUE_TABLES: &[(u32, &[(&str, &str)])] = &[
    (tags::MSG_TYPE, MSG_TYPES),
    (tags::ORD_STATUS, ORD_STATUS),
    (tags::EXEC_TYPE, EXEC_TYPE),
    (tags::SIDE, SIDE),
    (tags::ORD_TYPE, ORD_TYPE),
    (tags::TIME_IN_FORCE, TIME_IN_FORCE),
];
