pub mod exchange_rate;
pub mod token;
pub mod user;

pub use exchange_rate::ExchangeRates;
pub use token::AuthToken;
pub use user::User;
