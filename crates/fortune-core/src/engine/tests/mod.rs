mod common;
mod domain;
mod scorer;
