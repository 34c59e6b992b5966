pub mod aggregate;

pub use aggregate::{EmployeeLoan, EmployeeLoanDto, EmployeeLoanId, LoanListResponse, LoanStatus};
