pub fn step() -> i32 {
    let total = 2;
    total * total
}
