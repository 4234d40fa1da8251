//! PhoneBook CLI Client
//!
//! Command-line interface for a running phone book server.

use clap::{Parser, Subcommand};
use phonebook::{Client, Entry, Record, Result};

/// PhoneBook CLI
#[derive(Parser, Debug)]
#[command(name = "phonebook-cli")]
#[command(about = "CLI for the phone book server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every record
    List,

    /// Get a record, or one entry of it
    Get {
        /// Surname
        surname: String,

        /// First name (omit for the whole record)
        first_name: Option<String>,
    },

    /// Add or replace an entry
    Put {
        /// Surname
        surname: String,

        /// First name
        first_name: String,

        /// Telephone number
        telephone: String,

        #[arg(long, default_value = "")]
        line1: String,

        #[arg(long, default_value = "")]
        line2: String,

        #[arg(long, default_value = "")]
        town: String,

        #[arg(long, default_value = "")]
        county: String,

        #[arg(long, default_value = "")]
        country: String,

        #[arg(long, default_value = "")]
        postcode: String,
    },

    /// Delete a record, or one entry of it
    Del {
        /// Surname
        surname: String,

        /// First name (omit to delete the whole record)
        first_name: Option<String>,
    },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args.server, args.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(server: &str, command: Commands) -> Result<()> {
    let mut client = Client::connect(server)?;

    match command {
        Commands::List => {
            let records = client.list()?;
            if records.is_empty() {
                println!("(empty)");
            }
            for record in &records {
                print_record(record);
            }
        }
        Commands::Get {
            surname,
            first_name: None,
        } => match client.get_record(&surname)? {
            Some(record) => print_record(&record),
            None => println!("(not found)"),
        },
        Commands::Get {
            surname,
            first_name: Some(first_name),
        } => match client.get_entry(&surname, &first_name)? {
            Some(entry) => print_entry(&surname, &entry),
            None => println!("(not found)"),
        },
        Commands::Put {
            surname,
            first_name,
            telephone,
            line1,
            line2,
            town,
            county,
            country,
            postcode,
        } => {
            let entry = Entry {
                first_name,
                telephone,
                address_line1: line1,
                address_line2: line2,
                town_or_city: town,
                county_or_state: county,
                country,
                postal_code: postcode,
            };
            println!("{}", client.put(&surname, &entry)?);
        }
        Commands::Del {
            surname,
            first_name: None,
        } => {
            client.delete_record(&surname)?;
            println!("OK");
        }
        Commands::Del {
            surname,
            first_name: Some(first_name),
        } => {
            client.delete_entry(&surname, &first_name)?;
            println!("OK");
        }
        Commands::Ping => println!("{}", client.ping()?),
    }

    Ok(())
}

fn print_record(record: &Record) {
    for entry in &record.entries {
        print_entry(&record.surname, entry);
    }
}

fn print_entry(surname: &str, entry: &Entry) {
    println!("{}, {}: {}", surname, entry.first_name, entry.telephone);

    let address: Vec<&str> = [
        entry.address_line1.as_str(),
        entry.address_line2.as_str(),
        entry.town_or_city.as_str(),
        entry.county_or_state.as_str(),
        entry.country.as_str(),
        entry.postal_code.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();

    if !address.is_empty() {
        println!("    {}", address.join(", "));
    }
}
