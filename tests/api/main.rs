mod catalog;
mod checkout;
mod config;
mod health_check;
mod test_utils;
