//! Interactive contact manager over stdin/stdout.
//!
//! Run with `cargo run --example contacts_menu`. Set `RUST_LOG=debug` to see
//! what the book does with each command.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};

use avl_store::workload::{self, BenchConfig};
use avl_store::ContactBook;

const CSV_PATH: &str = "performance_avl.csv";

struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Prints `label` and reads one line without its newline. `None` on EOF.
    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

fn main() -> io::Result<()> {
    env_logger::init();

    let stdin = io::stdin();
    let mut prompt = Prompt {
        input: stdin.lock(),
        output: io::stdout().lock(),
    };
    let mut book = ContactBook::new();

    loop {
        writeln!(
            prompt.output,
            "\nContact Management System (AVL Tree)\n\
             1. Insert\n2. Search\n3. Update\n4. Delete\n5. Display\n6. Benchmark\n7. Exit"
        )?;
        let Some(choice) = prompt.ask("Enter choice: ")? else {
            break;
        };

        match choice.trim() {
            "1" => {
                let (Some(name), Some(phone), Some(email)) = (
                    prompt.ask("Name: ")?,
                    prompt.ask("Phone: ")?,
                    prompt.ask("Email: ")?,
                ) else {
                    break;
                };
                match book.insert(&name, &phone, &email) {
                    Ok(()) => writeln!(prompt.output, "Contact added: {name}")?,
                    Err(e) => writeln!(prompt.output, "{e}")?,
                }
            }
            "2" => {
                let Some(name) = prompt.ask("Name: ")? else {
                    break;
                };
                match book.get(&name) {
                    Some(contact) => writeln!(prompt.output, "Found: {name} | {contact}")?,
                    None => writeln!(prompt.output, "Contact not found.")?,
                }
            }
            "3" => {
                let (Some(name), Some(phone), Some(email)) = (
                    prompt.ask("Name: ")?,
                    prompt.ask("New phone (empty keeps current): ")?,
                    prompt.ask("New email (empty keeps current): ")?,
                ) else {
                    break;
                };
                let phone = Some(phone.as_str()).filter(|p| !p.is_empty());
                let email = Some(email.as_str()).filter(|e| !e.is_empty());
                match book.update(&name, phone, email) {
                    Ok(()) => writeln!(prompt.output, "Contact updated: {name}")?,
                    Err(e) => writeln!(prompt.output, "{e}")?,
                }
            }
            "4" => {
                let Some(name) = prompt.ask("Name: ")? else {
                    break;
                };
                match book.remove(&name) {
                    Ok(_) => writeln!(prompt.output, "Contact deleted: {name}")?,
                    Err(e) => writeln!(prompt.output, "{e}")?,
                }
            }
            "5" => {
                if book.is_empty() {
                    writeln!(prompt.output, "No contacts available.")?;
                } else {
                    write!(prompt.output, "{}", book.listing())?;
                }
            }
            "6" => {
                // Runs on its own book so the user's contacts are kept.
                let timings = workload::run(&BenchConfig::default());
                workload::write_csv(BufWriter::new(File::create(CSV_PATH)?), &timings)?;
                writeln!(prompt.output, "AVL benchmark written to {CSV_PATH}")?;
            }
            "7" => break,
            _ => writeln!(prompt.output, "Invalid choice! Try again.")?,
        }
    }

    book.clear();
    writeln!(prompt.output, "Exiting...")?;
    Ok(())
}
