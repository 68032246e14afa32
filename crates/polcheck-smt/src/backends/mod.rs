pub mod external;
pub mod smtlib_printer;
