use std::fmt::Write as _;

struct Counter {
    total: usize,
}

fn helper(count: usize) -> String {
    let mut out = String::new();
    let _ = write!(out, "count = {count}");
    out
}

fn main() {
    let c = Counter { total: 3 };
    let message = helper(c.total);
    println!("{message}");
}
