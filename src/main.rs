fn main() {
    emolang::cli::run();
}
