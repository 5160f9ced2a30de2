mod config;

fn main() {
    let mut total = 0;
    total += config::step();
    println!("{}", total);
}
