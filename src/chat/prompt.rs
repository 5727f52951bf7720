//! System instruction sent with every assistant request.

use crate::catalog::{Catalog, Module};

/// Lists every module with its item and variable codes so the model can map
/// the user's wording onto the query tool's arguments.
pub fn system_instruction(catalog: &Catalog) -> String {
    let mut lines: Vec<String> = vec![
        "You are an agricultural data assistant.".to_string(),
        "When querying the database, you MUST map user terms to these exact codes.".to_string(),
        "If the user asks for a specific module (e.g. 'crops'), use that module code.".to_string(),
        "If the module is ambiguous, infer it from the Item requested (e.g. 'Wheat' implies the 'crop' module).".to_string(),
        String::new(),
        "### MODULES MAP:".to_string(),
    ];

    for module in Module::ALL {
        lines.push(format!("- \"{}\" ({})", module.code(), module.display_name()));
    }

    lines.push("\n### ITEMS MAP (Item Name -> Code):".to_string());
    for (module, vocabulary) in catalog.modules() {
        lines.push(format!("\n[Module: {}]", module.code()));
        for (code, label) in &vocabulary.items {
            lines.push(format!("- {} -> \"{}\"", label, code));
        }
    }

    lines.push("\n### VARIABLES MAP (Metric -> Code):".to_string());
    for (module, vocabulary) in catalog.modules() {
        lines.push(format!("\n[Module: {}]", module.code()));
        for (code, label) in &vocabulary.variables {
            lines.push(format!("- {} -> \"{}\"", label, code));
        }
    }

    lines.push(
        "\n### REGION: If the user is unclear about a region, assume they're asking about all regions"
            .to_string(),
    );
    lines.push("\nIMPORTANT: Always answer in a helpful, concise manner.".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_lists_modules_items_and_variables() {
        let instruction = system_instruction(&Catalog::standard());
        assert!(instruction.starts_with("You are an agricultural data assistant."));
        assert!(instruction.contains("- \"landcover\" (Land Cover Projection)"));
        assert!(instruction.contains("[Module: crop]\n- Wheat -> \"wht\""));
        assert!(instruction.contains("- Land Area -> \"land\""));
        assert!(instruction.ends_with("IMPORTANT: Always answer in a helpful, concise manner."));
    }
}
