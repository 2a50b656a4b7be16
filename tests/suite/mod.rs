mod binary;
mod config;
mod deferred;
mod pitfall;
