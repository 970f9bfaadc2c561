mod input;
mod integration;
