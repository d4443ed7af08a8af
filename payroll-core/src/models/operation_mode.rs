use serde::{Deserialize, Serialize};

/// Which result quantity a calculation produces.
///
/// The numeric [`id`](Self::id) is the `operation_type.id_operation` key the
/// log and the stored procedure are written against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationMode {
    #[default]
    NetPay,
    TotalContributions,
}

impl OperationMode {
    pub fn id(&self) -> i32 {
        match self {
            Self::NetPay => 1,
            Self::TotalContributions => 2,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::NetPay),
            2 => Some(Self::TotalContributions),
            _ => None,
        }
    }

    /// Short code used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetPay => "net-pay",
            Self::TotalContributions => "total-contributions",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "net-pay" | "net" | "1" => Some(Self::NetPay),
            "total-contributions" | "contrib" | "contributions" | "2" => {
                Some(Self::TotalContributions)
            }
            _ => None,
        }
    }

    /// Operation name as stored in `operation_type.op_name`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NetPay => "Заработная плата к выплате",
            Self::TotalContributions => "Сумма страховых взносов",
        }
    }

    /// Caption printed in front of a computed amount.
    pub fn result_caption(&self) -> &'static str {
        match self {
            Self::NetPay => "Зарплата к выплате",
            Self::TotalContributions => "Сумма страховых взносов",
        }
    }
}

/// A row of `operation_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationType {
    pub id: i32,
    pub name: String,
}

impl OperationType {
    /// The mode this row stands for, if its id is a known one.
    pub fn mode(&self) -> Option<OperationMode> {
        OperationMode::from_id(self.id)
    }
}
