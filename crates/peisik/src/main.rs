// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

// the command-line launcher.
//
// to run a compiled module:
// - `$ peisik /path/to/app.cpeisik`
// - `$ peisik app` (the default extension '.cpeisik' is appended when
//   the name carries none)
//
// several modules can be given; they are loaded and executed one after
// the other. the exit code is 0 when every module ran to completion,
// and 1 on the first error:
//
// - an application error (a bug in the user program, e.g. a division
//   by zero) is reported as "Error: ..."
// - everything else (an unreadable file, a malformed module, a broken
//   invariant) is reported as "Interpreter error: ..."

use std::{fs::File, process::exit, time::Instant};

use memmap2::Mmap;

use peisik_binary::module_image::ModuleImage;
use peisik_program::program::Program;
use peisik_runtime::interpreter::Interpreter;
use peisik_types::{ApplicationError, RuntimeError};

const DEFAULT_MODULE_EXTENSION: &str = ".cpeisik";

#[derive(Default)]
struct LaunchOptions {
    count_ops: bool,
    dump_stats: bool,
    timing: bool,
    trace: bool,
    verbose: bool,
}

fn print_help() {
    println!("The Peisik interpreter");
    println!("Usage: peisik [modules] [parameters]");
    println!("Possible parameters:");
    println!(" --countops  Print statistics on executed operations.");
    println!(" --dumpstats Instead of running the program, print basic bytecode statistics.");
    println!(" --help      Show this help.");
    println!(" --timing    Print timings.");
    println!(" --trace     Print each executed instruction.");
    println!(" --verbose   Print extended debugging information.");
}

fn dump_module_info(program: &Program, module_name: &str) {
    println!("-- {}", module_name);
    println!("   Constants: {}", program.constant_count());
    println!("   Functions: {}", program.function_count());
    println!("   Main function index: {}", program.main_function_index());

    let mut total_code_size = 0;
    for index in 0..program.function_count() {
        if let Ok(function) = program.function(index) {
            total_code_size += function.bytecode().len();
        }
    }
    println!("   Total code size: {}", total_code_size);
}

fn report_error_and_exit(error: &dyn RuntimeError) -> ! {
    if error.as_any().is::<ApplicationError>() {
        // application errors arise from user code bugs
        println!("Error: {}", error.get_message());
    } else {
        // the rest are invalid modules, failed invariants or other
        // interpreter bugs
        println!("Interpreter error: {}", error.get_message());
    }
    exit(1);
}

fn main() {
    let mut modules_to_execute: Vec<String> = vec![];
    let mut options = LaunchOptions::default();
    let mut show_help = false;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        show_help = true;
    }

    for arg in &args {
        match arg.as_str() {
            "--countops" => options.count_ops = true,
            "--dumpstats" => options.dump_stats = true,
            "--timing" => options.timing = true,
            "--trace" => options.trace = true,
            "--verbose" => options.verbose = true,
            "--help" => show_help = true,
            _ if arg.starts_with("--") => {
                println!("Unknown parameter: {}", arg);
                show_help = true;
            }
            _ => modules_to_execute.push(arg.clone()),
        }
    }

    if show_help {
        print_help();
        return;
    }

    let total_start = Instant::now();

    for module_path in &modules_to_execute {
        let mut module_path = module_path.clone();
        if !module_path.contains('.') {
            module_path.push_str(DEFAULT_MODULE_EXTENSION);
        }

        if options.verbose {
            println!("Loading module {}", module_path);
        }

        let file = match File::open(&module_path) {
            Ok(file) => file,
            Err(_) => {
                println!("Could not open the module {}", module_path);
                exit(1);
            }
        };

        // the module file is read-only for the whole run
        let binary = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(_) => {
                println!("Could not open the module {}", module_path);
                exit(1);
            }
        };

        let import_start = Instant::now();
        let image = match ModuleImage::load(&binary) {
            Ok(image) => image,
            Err(error) => report_error_and_exit(&error),
        };
        let import_time = import_start.elapsed();

        let program = Program::new(image);

        if options.dump_stats {
            dump_module_info(&program, &module_path);
            continue;
        }

        let stdout = std::io::stdout();
        let mut output = stdout.lock();
        let mut interpreter = Interpreter::new(program, &mut output);
        interpreter.set_trace(options.trace);

        let execute_start = Instant::now();
        let result = interpreter.execute();
        let execute_time = execute_start.elapsed();

        if let Err(error) = result {
            report_error_and_exit(error.as_ref());
        }

        if options.count_ops {
            if let Err(error) = interpreter.print_op_count() {
                report_error_and_exit(error.as_ref());
            }
        }

        if options.timing {
            println!("-- Timings for {}", module_path);
            println!("   Import: {} s", import_time.as_secs_f64());
            println!("   Execution: {} s", execute_time.as_secs_f64());
            println!("   Total: {} s", (import_time + execute_time).as_secs_f64());
        }
    }

    if options.timing {
        println!(
            "-- Total time for all modules: {} s",
            total_start.elapsed().as_secs_f64()
        );
    }
}
