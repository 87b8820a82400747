pub mod broker_janitor;
