pub mod a001_stock_item;
pub mod a002_employee_loan;
pub mod a003_rental_contract;
pub mod a004_fuel_sale;
