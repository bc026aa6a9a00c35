//! Reasoning templates, one per cognitive tool and verbosity level.

use contextweave_core::cognitive::{CognitiveTool, TaskContext, Verbosity};

/// Render the template for `tool` at `verbosity`.
pub fn render(tool: CognitiveTool, verbosity: Verbosity, ctx: &TaskContext) -> String {
    match tool {
        CognitiveTool::Understand => understand(verbosity, ctx),
        CognitiveTool::Plan => plan(verbosity, ctx),
        CognitiveTool::Execute => execute(verbosity),
        CognitiveTool::Verify => verify(verbosity, ctx),
        CognitiveTool::Reflect => reflect(verbosity),
    }
}

fn head(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

fn understand(verbosity: Verbosity, ctx: &TaskContext) -> String {
    match verbosity {
        Verbosity::Minimal => "<UNDERSTAND>
Parse request: What does the user want? What entities are involved?
</UNDERSTAND>"
            .to_string(),
        Verbosity::Standard => {
            let ellipsis = if ctx.user_message.chars().count() > 200 { "..." } else { "" };
            format!(
                "<UNDERSTAND>
Before acting, parse the user's request:
1. GOAL: What is the primary objective?
2. ENTITIES: What files, folders, or paths are mentioned?
3. CONTEXT: Any references to previous actions (\"inside it\", \"that folder\")?
4. CONSTRAINTS: Any specific requirements or restrictions?

User message: \"{}{ellipsis}\"
</UNDERSTAND>",
                head(&ctx.user_message, 200)
            )
        }
        Verbosity::Detailed => {
            let memory = match &ctx.memory_context {
                Some(memory) if !memory.is_empty() => {
                    format!("Memory context available: {}...", head(memory, 200))
                }
                _ => "No memory context available.".to_string(),
            };
            format!(
                "<UNDERSTAND>
Carefully analyze the user's request before proceeding:

1. PRIMARY GOAL
   - What is the user trying to accomplish?
   - Is this a question, a task, or a combination?

2. ENTITY EXTRACTION
   - Files mentioned: [list any file names or types]
   - Folders mentioned: [list any folder names or paths]
   - Paths involved: [list explicit paths like ~/Desktop/...]

3. CONTEXTUAL REFERENCES
   - Does \"it\", \"that\", \"this\" refer to something from memory?
   - Any relative references (\"inside\", \"within\", \"next to\")?

4. IMPLICIT REQUIREMENTS
   - What isn't said but is expected?
   - Any common patterns or conventions to follow?

5. EDGE CASES
   - What could go wrong?
   - Any ambiguities to clarify?

User message: \"{}\"

{memory}
</UNDERSTAND>",
                ctx.user_message
            )
        }
    }
}

fn plan(verbosity: Verbosity, ctx: &TaskContext) -> String {
    match verbosity {
        Verbosity::Minimal => "<PLAN>
Steps to complete this task:
1. [First action]
2. [Second action if needed]
3. [Final confirmation]
</PLAN>"
            .to_string(),
        Verbosity::Standard => "<PLAN>
Based on understanding, create an execution plan:

STEPS:
1. [What to do first - usually read/understand current state]
2. [Main action - create, modify, or query]
3. [Follow-up actions if multi-step]
4. [Verify and confirm completion]

TOOLS NEEDED:
- [List tools that will be used: create_folder, write_file, etc.]

DEPENDENCIES:
- [Any step that depends on another - e.g., can't write to folder until folder exists]
</PLAN>"
            .to_string(),
        Verbosity::Detailed => {
            let tools = if ctx.available_tools.is_empty() {
                "filesystem tools".to_string()
            } else {
                ctx.available_tools.join(", ")
            };
            format!(
                "<PLAN>
Create a detailed execution plan:

## STEP BREAKDOWN

| Step | Action | Tool | Path/Args | Depends On |
|------|--------|------|-----------|------------|
| 1    | [action] | [tool] | [path] | - |
| 2    | [action] | [tool] | [path] | Step 1 |
| ...  | ... | ... | ... | ... |

## VALIDATION CHECKPOINTS
- After Step 1: [What should be true?]
- After Step 2: [What should be true?]
- Final: [How to confirm success?]

## ROLLBACK PLAN
If any step fails:
- [What to do to recover?]
- [Any cleanup needed?]

## RESOURCE REQUIREMENTS
- Files to read: [list]
- Files to create: [list]
- Folders to create: [list]

Available tools: {tools}
</PLAN>"
            )
        }
    }
}

fn execute(verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Minimal => "<EXECUTE>
Run one tool call per step and check each result before the next.
</EXECUTE>"
            .to_string(),
        Verbosity::Standard | Verbosity::Detailed => "<EXECUTE>
Now executing the plan:

CURRENT STEP: [step number and description]
TOOL CALL: [tool name with arguments]
EXPECTED RESULT: [what should happen]

After each tool execution:
- Check if result matches expected
- Update plan if needed
- Proceed to next step
</EXECUTE>"
            .to_string(),
    }
}

fn verify(verbosity: Verbosity, ctx: &TaskContext) -> String {
    match verbosity {
        Verbosity::Minimal => "<VERIFY>
Confirm: Did all actions complete successfully? Does the result match user's request?
</VERIFY>"
            .to_string(),
        Verbosity::Standard | Verbosity::Detailed => format!(
            "<VERIFY>
Verification checklist:

1. COMPLETION CHECK
   [ ] All planned steps executed
   [ ] No errors in tool results
   [ ] All files/folders created as expected

2. REQUIREMENT CHECK
   [ ] Original request satisfied
   [ ] Paths are correct (using ~ not /~)
   [ ] Content matches expectations

3. STATE CHECK
   [ ] File system in expected state
   [ ] No unintended side effects
   [ ] User can find created items

Original request: \"{}...\"
</VERIFY>",
            head(&ctx.user_message, 150)
        ),
    }
}

fn reflect(verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Minimal => "<REFLECT>
Note what worked and what to remember for follow-up requests.
</REFLECT>"
            .to_string(),
        Verbosity::Standard | Verbosity::Detailed => "<REFLECT>
Post-task reflection:

WHAT WORKED WELL:
- [Successful patterns to remember]

WHAT COULD IMPROVE:
- [Any inefficiencies or issues]

LEARNINGS:
- [Key insights for future similar tasks]

MEMORY UPDATE:
- [What should be remembered for follow-up requests]
</REFLECT>"
            .to_string(),
    }
}
