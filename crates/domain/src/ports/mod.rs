use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub mod aid;
pub mod db;
pub mod directory;
pub mod issues;
pub mod registry;
pub mod sessions;
