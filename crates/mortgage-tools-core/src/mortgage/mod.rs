pub mod affordability;
pub mod investment;
pub mod purchase;
pub mod refinance;
pub mod rent_vs_buy;
