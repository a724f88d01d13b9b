//! Tests for autograd operations with gradient checking

mod prop_conv;
mod second_order;
mod unit_ops;
