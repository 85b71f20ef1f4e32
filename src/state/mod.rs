//! State components the coordinator composes.
//!
//! Each owns its data and its own `CachedClient`, so each exposes its own
//! loading flag while sharing one cache.

mod employees;
mod paginated_transactions;
mod transactions_by_employee;

pub use employees::EmployeesState;
pub use paginated_transactions::PaginatedTransactionsState;
pub use transactions_by_employee::TransactionsByEmployeeState;
