fn main() {
    if let Err(e) = tournament_bracket_lib::run() {
        eprintln!("tournament-bracket: {e}");
        std::process::exit(1);
    }
}
