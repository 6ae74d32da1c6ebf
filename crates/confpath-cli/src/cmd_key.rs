use anyhow::Result;
use clap::Subcommand;
use confpath::v1::{decode, encode_list_path, split_list_segment};
use serde_json::json;

#[derive(Subcommand, Debug)]
pub enum KeyOp {
    /// Build the address of a list entry from its key value
    Encode {
        /// List name
        list: String,

        /// Key value, unescaped
        value: String,

        /// Path of the list's parent
        #[arg(long, default_value = "")]
        base: String,
    },
    /// Split a `list=key` segment and unescape the key
    Decode {
        /// Segment such as `user=a%2Fb`; a bare escaped value is also accepted
        segment: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(op: &KeyOp, pretty: bool) -> Result<()> {
    match op {
        KeyOp::Encode { list, value, base } => {
            println!("{}", encode_list_path(base, list, value));
        }
        KeyOp::Decode { segment, json } => {
            let (list, key) = match split_list_segment(segment) {
                Some((list, key)) => (Some(list), key),
                None => (None, decode(segment)),
            };
            if *json {
                let out = json!({"list": list, "key": key});
                if pretty {
                    println!("{}", serde_json::to_string_pretty(&out)?);
                } else {
                    println!("{}", out);
                }
            } else {
                println!("{}", key);
            }
        }
    }
    Ok(())
}
