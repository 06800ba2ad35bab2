mod common;
mod features;
mod regression;
mod selection;
