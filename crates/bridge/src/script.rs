//! Generated interpreter scripts.
//!
//! Caller text never appears in a script verbatim: it is embedded as a Base64
//! literal and decoded by the interpreter, so quotes and backslashes in the
//! input cannot escape the literal.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pickles_core::ModuleVariant;

/// Import block binding the selected module to the name `pickle`.
fn import_block(variant: ModuleVariant) -> &'static str {
    match variant {
        ModuleVariant::Pickle => "import pickle\n",
        ModuleVariant::Pickle5 => {
            "try:\n    import pickle5 as pickle\nexcept ImportError:\n    import pickle\n"
        }
    }
}

fn protocol_arg(variant: ModuleVariant) -> &'static str {
    match variant {
        ModuleVariant::Pickle => "",
        ModuleVariant::Pickle5 => ", protocol=5",
    }
}

/// Script that pickles `text` as a `str` and writes the raw bytes to stdout.
pub fn serialize_script(text: &str, variant: ModuleVariant) -> String {
    format!(
        "import base64\nimport sys\n{import}\
         value = base64.b64decode('{encoded}').decode('utf-8')\n\
         data = pickle.dumps(value{protocol})\n\
         sys.stdout.buffer.write(data)\n\
         sys.stdout.buffer.flush()\n",
        import = import_block(variant),
        encoded = STANDARD.encode(text.as_bytes()),
        protocol = protocol_arg(variant),
    )
}

/// Script that unpickles the file at `path` and prints the value.
pub fn deserialize_script(path: &str, variant: ModuleVariant) -> String {
    format!(
        "{import}\
         with open({path}, 'rb') as f:\n    obj = pickle.load(f)\n\
         print(obj)\n",
        import = import_block(variant),
        path = python_str_literal(path),
    )
}

/// Single-quoted Python string literal for `value`.
pub fn python_str_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
