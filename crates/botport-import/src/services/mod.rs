//! Import dispatch services

mod dispatcher;

pub use dispatcher::ImportDispatcher;
