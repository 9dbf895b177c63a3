pub mod extra_payments;
pub mod schedule;

pub use schedule::{
    build_amortization_table, calculate_amortization, summarize, AmortizationResult,
    AmortizationTable, ExtraPayment, LoanInputs, PaymentScheduleEntry, Schedule, ScheduleIter,
};
