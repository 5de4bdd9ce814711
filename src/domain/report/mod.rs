//! Weekly and monthly business reports.
//!
//! Report generation is pure: the application layer loads the records in
//! range and hands them here together with name lookups.

mod generator;

pub use generator::{
    generate_report, Attendance, AwardLine, ChildActivity, CoachPerformance, Report,
    ReportInputs, ReportPeriod, ReportRange, COACH_RATE_PER_SESSION_LKR,
};
