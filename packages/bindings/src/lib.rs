use mortgage_tools_core::amortization::{self, extra_payments, LoanInputs};
use mortgage_tools_core::mortgage::{affordability, investment, purchase, refinance, rent_vs_buy};
use mortgage_tools_core::MortgageResult;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse `input_json`, run the calculator and serialize its output.
fn run_json<I, O>(
    input_json: &str,
    calculate: impl FnOnce(&I) -> MortgageResult<O>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = calculate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_amortization(input_json: String) -> NapiResult<String> {
    run_json::<LoanInputs, _>(&input_json, amortization::calculate_amortization)
}

#[napi]
pub fn build_amortization_schedule(input_json: String) -> NapiResult<String> {
    run_json::<LoanInputs, _>(&input_json, amortization::build_amortization_table)
}

#[napi]
pub fn analyze_extra_payments(input_json: String) -> NapiResult<String> {
    run_json::<LoanInputs, _>(&input_json, extra_payments::analyze_extra_payments)
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_purchase(input_json: String) -> NapiResult<String> {
    run_json::<purchase::PurchaseInput, _>(&input_json, purchase::calculate_purchase)
}

#[napi]
pub fn check_pre_approval(input_json: String) -> NapiResult<String> {
    run_json::<affordability::PreApprovalInput, _>(&input_json, affordability::check_pre_approval)
}

#[napi]
pub fn analyze_refinance(input_json: String) -> NapiResult<String> {
    run_json::<refinance::RefinanceInput, _>(&input_json, refinance::analyze_refinance)
}

#[napi]
pub fn analyze_rent_vs_buy(input_json: String) -> NapiResult<String> {
    run_json::<rent_vs_buy::RentVsBuyInput, _>(&input_json, rent_vs_buy::analyze_rent_vs_buy)
}

#[napi]
pub fn analyze_investment(input_json: String) -> NapiResult<String> {
    run_json::<investment::InvestmentInput, _>(&input_json, investment::analyze_investment)
}
