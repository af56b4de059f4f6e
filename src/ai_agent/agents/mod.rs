pub mod agent;
pub mod financial_analyst;
pub mod investment_advisor;
pub mod risk_assessor;
pub mod verifier;
