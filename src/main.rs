fn main() {
    xmlui_front::cli::run();
}
