use mdr_index::MdrReader;
use std::env;
use std::fs::File;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-mdr-file>", args[0]);
        std::process::exit(1);
    }

    let path = &args[1];
    println!("Reading MDR index: {}", path);
    println!("{}", "=".repeat(60));

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("ERROR: cannot open {}: {}", path, e);
            std::process::exit(1);
        }
    };

    match MdrReader::new(file) {
        Ok(mut reader) => {
            println!("\nIndex Information:");
            println!("  Code page: {}", reader.header.codepage);
            println!("  Sort id: {:#x}", reader.header.sort_id);
            println!(
                "  Build: {}",
                if reader.is_for_device() {
                    "for device"
                } else {
                    "full"
                }
            );
            println!("  Maps: {}", reader.header.num_maps);

            if let Ok(maps) = reader.map_numbers() {
                for (i, map) in maps.iter().enumerate() {
                    println!("    {}. {:08}", i + 1, map);
                }
            }

            println!("\nSections:");
            println!(
                "  {:>3}  {:>10}  {:>10}  {:>6}  {:>8}  {:>10}",
                "sec", "offset", "end", "item", "records", "extra"
            );
            for number in reader.present_sections() {
                let entry = *reader.section(number);
                let records = if entry.item_size > 0 {
                    (entry.len_bytes() / entry.item_size as u32).to_string()
                } else {
                    "-".to_string()
                };
                println!(
                    "  {:>3}  {:>10}  {:>10}  {:>6}  {:>8}  {:>#10x}",
                    number, entry.offset, entry.end, entry.item_size, records, entry.extra
                );
            }

            if !reader.is_for_device() {
                if let Ok(strings) = reader.strings() {
                    println!("\nString pool: {} strings", strings.len());
                    for (i, s) in strings.iter().take(10).enumerate() {
                        println!("  {}. {}", i + 1, s);
                    }
                    if strings.len() > 10 {
                        println!("  ... and {} more", strings.len() - 10);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to read MDR file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
