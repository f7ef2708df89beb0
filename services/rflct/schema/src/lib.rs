pub mod rflct_codes;
