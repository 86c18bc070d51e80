use props_core::{Grammar, Node, Syntax};

fn print_tree(node: &Node<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::List(items) => {
            println!("{}List ({} items)", indent, items.len());
            for item in items {
                print_tree(item, depth + 1);
            }
        }
        Node::Pair { key, value, form } => {
            println!("{}Pair {:?}", indent, form);
            print_tree(key, depth + 1);
            print_tree(value, depth + 1);
        }
        Node::Properties(sections) => {
            for section in sections {
                println!("{}Section {:?}", indent, section.name);
                for child in &section.children {
                    print_tree(child, depth + 1);
                }
            }
        }
        other => println!("{}{:?}", indent, other),
    }
}

fn main() {
    let input = "# window setup\nwindow: (1280, 800) title = main {scale = 3/2}\nfont: mono 11 1/2\n";

    println!("Input: {:?}\n", input);

    let syntax = Syntax::default();
    println!(
        "Pair prefix of {:?}: {:?}",
        "title = main rest",
        syntax.pair().match_len("title = main rest")
    );

    match syntax.parse_document(input) {
        Ok(doc) => {
            println!("\nTree:");
            print_tree(&doc, 1);
            println!("\nCanonical:\n{}", doc);
        }
        Err(err) => eprintln!("error: {}", err),
    }
}
