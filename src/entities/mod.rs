//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod credit_card_account;
pub mod pocket;
pub mod system_state;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use credit_card_account::{
    Column as CreditCardAccountColumn, Entity as CreditCardAccount, Model as CreditCardAccountModel,
};
pub use pocket::{Column as PocketColumn, Entity as Pocket, Model as PocketModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
