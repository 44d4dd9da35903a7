use crate::output::print_json;
use casegen_core::form::GenerateForm;
use casegen_core::prompt::build_prompt;

#[derive(clap::Args, Debug)]
pub struct PromptArgs {
    /// Feature description the test cases are for
    #[arg(long)]
    pub story: String,
    /// Functional, Negative or "BDD (Gherkin)"
    #[arg(long, default_value = "Functional")]
    pub test_type: String,
    /// "Manual Only", "Automation Only" or Both
    #[arg(long = "format", default_value = "Manual Only")]
    pub format_type: String,
    /// Automation framework (required unless the format is manual only)
    #[arg(long)]
    pub framework: Option<String>,
    /// Automation style
    #[arg(long)]
    pub style: Option<String>,
    #[arg(long)]
    pub expected_result: Option<String>,
    #[arg(long)]
    pub severity: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
}

impl From<PromptArgs> for GenerateForm {
    fn from(args: PromptArgs) -> Self {
        GenerateForm {
            user_story: args.story,
            test_type: args.test_type,
            format_type: args.format_type,
            framework: args.framework,
            style: args.style,
            expected_result: args.expected_result,
            severity: args.severity,
            category: args.category,
            ..Default::default()
        }
    }
}

pub fn run(args: PromptArgs, json: bool) -> anyhow::Result<()> {
    let form = GenerateForm::from(args);
    let validated = form.validate_for_prompt()?;
    let prompt = build_prompt(&validated.prompt_input());
    if json {
        return print_json(&serde_json::json!({ "prompt": prompt }));
    }
    print!("{prompt}");
    Ok(())
}
