//! Integration tests exercising the whole pipeline end to end.

mod diagnostics;
mod end_to_end;
