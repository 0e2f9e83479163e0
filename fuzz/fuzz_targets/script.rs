#![no_main]

use avl_backtrace::script::Interpreter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|script: &[u8]| {
    let mut interpreter = Interpreter::new(std::io::sink(), std::io::sink());

    // Non-UTF-8 input is a read error, not a crash.
    if interpreter.run(script).is_ok() {
        interpreter.tree().assert_invariants();
    }
});
