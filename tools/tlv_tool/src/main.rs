use chip_tlv::tlv;
use clap::{App, Arg};
use colored::Colorize;
use log::{debug, error};
use simple_logger::SimpleLogger;
use std::process;

const MAX_INPUT: usize = 1024;

fn parse_bytes(input: &str, base: u32) -> Result<Vec<u8>, String> {
    let mut tlv_list = Vec::new();
    for byte in input.split_whitespace() {
        let byte = byte.strip_suffix(',').unwrap_or(byte);
        let byte = byte.strip_prefix("0x").unwrap_or(byte);
        if byte.is_empty() {
            continue;
        }
        let b = u8::from_str_radix(byte, base)
            .map_err(|_| format!("Error parsing input byte: {}", byte))?;
        tlv_list.push(b);
        if tlv_list.len() > MAX_INPUT {
            return Err("Input too long".to_owned());
        }
    }
    Ok(tlv_list)
}

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .with_colors(true)
        .without_timestamps()
        .init()
        .unwrap();

    let m = App::new("tlv_tool")
        .arg(
            Arg::with_name("hex")
                .short("x")
                .long("hex")
                .help("The input is in Hexadecimal (Default)"),
        )
        .arg(
            Arg::with_name("dec")
                .short("d")
                .long("dec")
                .help("The input is in Decimal"),
        )
        .arg(
            Arg::with_name("validate")
                .long("validate")
                .help("Check the structure of the input before decoding"),
        )
        .arg(Arg::with_name("tlvs").help("List of TLVs").required(true))
        .get_matches();

    // Assume hexadecimal by-default
    let base = if m.is_present("dec") { 10 } else { 16 };

    let tlv_list = match parse_bytes(m.value_of("tlvs").unwrap_or_default(), base) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    debug!("Decoding: {:x?}", tlv_list);

    if m.is_present("validate") {
        match tlv::validate(&tlv_list) {
            Ok(()) => println!("{}", "Structure OK".green()),
            Err(e) => {
                println!("{} {}", "Invalid structure:".red(), e);
                process::exit(1);
            }
        }
    }

    match tlv::decode_all(&tlv_list) {
        Ok(elements) => {
            for (tag, value) in elements {
                if !tag.is_anonymous() {
                    print!("{}: ", tag.to_string().cyan());
                }
                print!("{}", value);
            }
        }
        Err(e) => {
            error!("Decoding failed: {}", e);
            process::exit(1);
        }
    }
}
