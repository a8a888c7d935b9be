/// Used for printing symbolic constants like FLOAT_VEC4
macro_rules! stringify_match {
    ($on:expr, ($($id:ident),+)) => {
        match $on {
            $($id => {stringify!($id)}),+
            _ => "UNKNOWN",
        }
    };
}
