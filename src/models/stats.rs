use serde::Serialize;

/// Dashboard counters. A count that failed to load reads as 0.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub faculty: i64,
    pub students: i64,
    pub activities: i64,
    pub achievements: i64,
    pub leadership: i64,
    pub messages: i64,
}
