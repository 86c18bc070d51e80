use std::io::Read;

use props_core::Syntax;

fn main() {
    let mut input = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read stdin: {}", err);
        std::process::exit(1);
    }

    match Syntax::default().parse_document(&input) {
        Ok(doc) => println!("{}", doc),
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}
