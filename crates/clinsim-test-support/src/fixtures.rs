//! Case tables shared by tests across crates.

use clinsim_cases::CaseTable;

/// Two well-formed cases.
///
/// "Chest Pain" runs 1 -> 2 -> END. Each step has a correct first option and
/// an incorrect second option that loops back to the same step.
/// "Sepsis" runs 1 -> 2 -> END with numeric score cells written as floats.
pub const SAMPLE_CASES_CSV: &str = "\
Case ID,Step ID,Patient Status,Scenario/Question,Options,Is Correct,Feedback,Next Step ID,Score Change,Consequence
Chest Pain,1,\"BP 90/60, HR 110\",A 58-year-old presents with crushing chest pain. What first?,Order CBC|Do nothing,TRUE|FALSE,Baseline labs guide further workup.|Delaying assessment risks deterioration.,2|1,10|-5,-|The patient becomes more diaphoretic and hypotensive.
Chest Pain,2,\"BP 95/60, HR 105\",The ECG shows ST elevation in V2-V4. Next step?,Give aspirin|Discharge home,TRUE|FALSE,Aspirin reduces mortality in acute coronary syndrome.|Discharging a STEMI is unsafe.,END|2,15|-10,-|The patient collapses in the parking lot.
Sepsis,1,\"Temp 39.2, HR 120\",An elderly patient is febrile and confused. What first?,Draw blood cultures|Wait for results,TRUE|FALSE,Cultures before antibiotics.|Time matters in sepsis.,2|1,5.0|-5.0,-|Lactate climbs to 4.
Sepsis,2,\"Temp 39.0, HR 115\",Cultures are drawn. Next?,Start antibiotics|Observe,TRUE|FALSE,Early antibiotics improve survival.|Observation delays treatment.,END|2,10|-10,-|Blood pressure drops further.
";

/// Parses [`SAMPLE_CASES_CSV`].
///
/// # Panics
///
/// Panics if the fixture no longer parses.
#[must_use]
pub fn sample_case_table() -> CaseTable {
    CaseTable::from_csv(SAMPLE_CASES_CSV).expect("sample cases fixture parses")
}
