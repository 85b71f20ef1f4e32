mod transactions;

pub use transactions::{draw_transactions, TransactionListProps};
