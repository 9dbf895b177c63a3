pub mod amortization;
pub mod history;
pub mod investment;
pub mod mortgage;
pub mod refinance;
pub mod rent_vs_buy;
