//! Inspect command implementation.

use swarm_spec::{Part, Spec};

/// Runs the inspect command.
pub fn run(tokens: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for token in tokens {
        let spec = Spec::parse(token)?;
        print!("{}", describe(&spec));
    }
    Ok(())
}

/// Renders the parts of one address token.
pub fn describe(spec: &Spec) -> String {
    let mut out = format!("{spec}\n");
    out.push_str(&format!("  pattern:   {}\n", spec.pattern()));
    for (name, part) in [
        ("type", Part::Type),
        ("id", Part::Id),
        ("stamp", Part::Stamp),
        ("op", Part::Op),
    ] {
        out.push_str(&format!(
            "  {:<10} {}\n",
            format!("{name}:"),
            spec.get(part).unwrap_or("-")
        ));
    }
    out.push_str(&format!("  handshake: {}\n", spec.is_handshake()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_handshake() {
        let spec = Spec::parse("/Swarm+Host#db!A.on").unwrap();
        let text = describe(&spec);
        assert!(text.starts_with("/Swarm+Host#db!A.on\n"));
        assert!(text.contains("pattern:   /#!."));
        assert!(text.contains("type:      Swarm+Host"));
        assert!(text.contains("handshake: true"));
    }

    #[test]
    fn describe_partial() {
        let text = describe(&Spec::parse(".error").unwrap());
        assert!(text.contains("id:        -"));
        assert!(text.contains("handshake: false"));
    }
}
