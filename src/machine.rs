//! This module defines the `TuringMachine` struct, which simulates a single-tape deterministic
//! Turing Machine on a bi-infinite tape. It owns the transition table, the control state and
//! the tape, and drives the read, write, move, transition loop until the halting state.

use crate::tape::Tape;
use crate::types::{
    Description, Direction, MachineError, State, Step, Symbol, Transition, TransitionField,
    ValidationMode, BLANK_SYMBOL, START_STATE,
};
use std::collections::HashMap;

/// Represents a single-tape Turing Machine.
///
/// States are the integers `[0, num_states)`. State `0` is the start state and
/// `num_states - 1` is the halting state.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    num_states: usize,
    num_symbols: Symbol,
    mode: ValidationMode,
    state: State,
    transitions: HashMap<(State, Symbol), Transition>,
    input: Vec<Symbol>,
    tape: Tape,
    step_count: u64,
}

impl TuringMachine {
    /// Creates a new `TuringMachine` with an empty transition table and a blank tape.
    ///
    /// # Arguments
    ///
    /// * `num_states` - The number of states, including the halting state. Must be at least 1.
    /// * `num_symbols` - The size of the input alphabet, excluding the blank symbol.
    ///
    /// # Returns
    ///
    /// * `Ok(TuringMachine)` in strict mode.
    /// * `Err(MachineError::ValidationError)` if `num_states` is zero.
    pub fn new(num_states: usize, num_symbols: Symbol) -> Result<Self, MachineError> {
        if num_states == 0 {
            return Err(MachineError::ValidationError(
                "A machine needs at least one state".to_string(),
            ));
        }

        Ok(Self {
            num_states,
            num_symbols,
            mode: ValidationMode::default(),
            state: START_STATE,
            transitions: HashMap::new(),
            input: Vec::new(),
            tape: Tape::new(),
            step_count: 0,
        })
    }

    /// Builds a machine from a parsed `Description`.
    ///
    /// Rows are registered against the `(state, symbol)` keys in table order and the
    /// description's input is loaded onto the tape.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::ValidationError)` if the description does not hold exactly one
    ///   row per `(state, symbol)` pair.
    /// * Any error from `add_transition` or `set_input`.
    pub fn from_description(
        description: &Description,
        mode: ValidationMode,
    ) -> Result<Self, MachineError> {
        description.validate()?;

        let mut machine =
            Self::new(description.num_states, description.num_symbols)?.with_mode(mode);

        for ((state, symbol), row) in description.keys().zip(&description.rows) {
            machine.add_transition(state, symbol, row.next_state, row.write, row.direction)?;
        }
        machine.set_input(&description.input)?;

        Ok(machine)
    }

    /// Sets the validation mode used by `add_transition` and `set_input`.
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Registers one entry of the transition table.
    ///
    /// Both state indices must lie in `[0, num_states)` in every mode. Strict mode also
    /// rejects transitions out of the halting state, the `Stay` direction and duplicate
    /// `(from_state, on_symbol)` keys; permissive mode lets a duplicate replace the
    /// earlier entry.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the transition was registered.
    /// * `Err(MachineError::InvalidTransition)` naming the offending field otherwise.
    pub fn add_transition(
        &mut self,
        from_state: State,
        on_symbol: Symbol,
        next_state: State,
        write: Symbol,
        direction: Direction,
    ) -> Result<(), MachineError> {
        self.check_state(from_state, TransitionField::FromState)?;
        self.check_state(next_state, TransitionField::NextState)?;

        if self.mode == ValidationMode::Strict {
            if from_state == self.halting_state() {
                return Err(MachineError::invalid_transition(
                    TransitionField::FromState,
                    format!("state {from_state} is the halting state and has no transitions"),
                ));
            }

            if direction == Direction::Stay {
                return Err(MachineError::invalid_transition(
                    TransitionField::Direction,
                    format!("state {from_state} on symbol {on_symbol} must move left or right"),
                ));
            }

            if self.transitions.contains_key(&(from_state, on_symbol)) {
                return Err(MachineError::invalid_transition(
                    TransitionField::Key,
                    format!("state {from_state} on symbol {on_symbol} is already defined"),
                ));
            }
        }

        self.transitions.insert(
            (from_state, on_symbol),
            Transition {
                next_state,
                write,
                direction,
            },
        );

        Ok(())
    }

    /// Loads a string of decimal digits onto the tape starting at position 0.
    ///
    /// In strict mode a non-digit character fails with `MachineError::InvalidInput`; in
    /// permissive mode it is written as the blank symbol. The machine is reset: the input
    /// replaces whatever the tape held, the head is left at position 0 and the control state
    /// returns to the start state.
    pub fn set_input(&mut self, input: &str) -> Result<(), MachineError> {
        let mut symbols = Vec::with_capacity(input.len());

        for (position, character) in input.chars().enumerate() {
            let symbol = match (character.to_digit(10), self.mode) {
                (Some(digit), _) => digit,
                (None, ValidationMode::Permissive) => BLANK_SYMBOL,
                (None, ValidationMode::Strict) => {
                    return Err(MachineError::InvalidInput {
                        position,
                        character,
                    })
                }
            };
            symbols.push(symbol);
        }

        self.input = symbols;
        self.reset();

        Ok(())
    }

    /// Executes a single step of the machine's computation.
    ///
    /// Reads the symbol under the head, looks up the transition for the current state,
    /// writes, moves the head and enters the next state.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if the machine performed a step and has not halted.
    /// * `Ok(Step::Halt)` if the machine is in the halting state, before or after this step.
    /// * `Err(MachineError::NoTransitionDefined)` if the table has no matching entry.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        if self.is_halted() {
            return Ok(Step::Halt);
        }

        let symbol = self.tape.read();
        let transition = self
            .transition(self.state, symbol)
            .copied()
            .ok_or(MachineError::NoTransitionDefined {
                state: self.state,
                symbol,
            })?;

        self.tape.write(transition.write);
        match transition.direction {
            Direction::Left => self.tape.move_left(),
            Direction::Right => self.tape.move_right(),
            Direction::Stay => {}
        }

        self.state = transition.next_state;
        self.step_count += 1;

        Ok(if self.is_halted() {
            Step::Halt
        } else {
            Step::Continue
        })
    }

    /// Runs the machine from the start state until it reaches the halting state.
    ///
    /// Every run starts from a fresh tape holding the last input given to `set_input`, so
    /// running the same machine twice yields the same output. There is no step limit: a
    /// machine that never halts never returns. Callers that need a bound drive `step`
    /// themselves.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` with the content of every visited cell, left to right.
    /// * `Err(MachineError)` if a step fails; no partial output is produced.
    pub fn run(&mut self) -> Result<String, MachineError> {
        self.reset();

        while self.step()? == Step::Continue {}

        self.output()
    }

    /// Resets the machine to its initial configuration: start state, zero steps and a
    /// fresh tape seeded with the current input.
    pub fn reset(&mut self) {
        self.state = START_STATE;
        self.step_count = 0;
        self.tape = Tape::new();
        self.tape.load(&self.input);
    }

    /// Returns the content of every visited cell, left to right.
    pub fn output(&self) -> Result<String, MachineError> {
        self.tape.visited_content()
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the halting state, `num_states - 1`.
    pub fn halting_state(&self) -> State {
        self.num_states - 1
    }

    /// Checks if the machine is in the halting state.
    pub fn is_halted(&self) -> bool {
        self.state == self.halting_state()
    }

    /// Returns the number of steps executed since the last reset.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_symbols(&self) -> Symbol {
        self.num_symbols
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Returns the machine's tape.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the transition registered for `(state, symbol)`, if any.
    pub fn transition(&self, state: State, symbol: Symbol) -> Option<&Transition> {
        self.transitions.get(&(state, symbol))
    }

    /// Returns the number of registered transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    fn check_state(&self, state: State, field: TransitionField) -> Result<(), MachineError> {
        if state >= self.num_states {
            return Err(MachineError::invalid_transition(
                field,
                format!(
                    "state {state} is out of range (machine has {} states)",
                    self.num_states
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction::{Left, Right, Stay};

    /// Unary increment: walk right over the 1s, turn the first blank into a 1 and halt.
    fn create_unary_increment() -> TuringMachine {
        let mut machine = TuringMachine::new(2, 1).unwrap();
        machine.add_transition(0, 0, 1, 1, Left).unwrap();
        machine.add_transition(0, 1, 0, 1, Right).unwrap();
        machine
    }

    fn create_two_state_busy_beaver() -> TuringMachine {
        let mut machine = TuringMachine::new(3, 1).unwrap();
        machine.add_transition(0, 0, 1, 1, Right).unwrap();
        machine.add_transition(0, 1, 1, 1, Left).unwrap();
        machine.add_transition(1, 0, 0, 1, Left).unwrap();
        machine.add_transition(1, 1, 2, 1, Right).unwrap();
        machine
    }

    #[test]
    fn test_machine_creation() {
        let machine = TuringMachine::new(3, 2).unwrap();

        assert_eq!(machine.state(), 0);
        assert_eq!(machine.halting_state(), 2);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.transition_count(), 0);
        assert_eq!(machine.mode(), ValidationMode::Strict);
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_from_description() {
        let description = Description {
            num_states: 2,
            num_symbols: 1,
            rows: vec![
                Transition {
                    next_state: 1,
                    write: 1,
                    direction: Left,
                },
                Transition {
                    next_state: 0,
                    write: 1,
                    direction: Right,
                },
            ],
            input: "11".to_string(),
        };

        let mut machine =
            TuringMachine::from_description(&description, ValidationMode::Strict).unwrap();
        assert_eq!(machine.transition_count(), 2);
        assert_eq!(machine.transition(0, 0).unwrap().direction, Left);
        assert_eq!(machine.run().unwrap(), "111");
    }

    #[test]
    fn test_from_description_rejects_wrong_row_count() {
        let row = Transition {
            next_state: 1,
            write: 1,
            direction: Right,
        };

        for rows in [vec![row; 4], vec![row; 1], Vec::new()] {
            let description = Description {
                num_states: 2,
                num_symbols: 1,
                rows,
                input: String::new(),
            };

            let result = TuringMachine::from_description(&description, ValidationMode::Permissive);
            assert!(matches!(result, Err(MachineError::ValidationError(_))));
        }
    }

    #[test]
    fn test_set_input_replaces_previous_tape() {
        let mut machine = create_unary_increment();
        machine.set_input("12").unwrap();
        machine.set_input("3").unwrap();
        assert_eq!(machine.output().unwrap(), "30");

        machine.set_input("11").unwrap();
        machine.step().unwrap();

        machine.set_input("1").unwrap();
        assert_eq!(machine.state(), 0);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.tape().head(), 0);
        assert_eq!(machine.output().unwrap(), "10");
    }

    #[test]
    fn test_zero_states_is_rejected() {
        let result = TuringMachine::new(0, 1);
        assert!(matches!(result, Err(MachineError::ValidationError(_))));
    }

    #[test]
    fn test_unary_increment() {
        let mut machine = create_unary_increment();
        machine.set_input("11").unwrap();

        assert_eq!(machine.run().unwrap(), "111");
        assert_eq!(machine.state(), 1);
        assert!(machine.is_halted());
        assert_eq!(machine.step_count(), 3);
    }

    #[test]
    fn test_busy_beaver_grows_left() {
        let mut machine = create_two_state_busy_beaver();
        machine.set_input("").unwrap();

        assert_eq!(machine.run().unwrap(), "1111");
        assert_eq!(machine.step_count(), 6);
        assert_eq!(machine.tape().visited_range(), -2..=1);
    }

    #[test]
    fn test_single_state_machine_halts_immediately() {
        let mut machine = TuringMachine::new(1, 1).unwrap();
        machine.set_input("").unwrap();

        assert_eq!(machine.run().unwrap(), "0");
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_missing_transition_fails_the_run() {
        let mut machine = TuringMachine::new(2, 1).unwrap();
        machine.add_transition(0, 1, 0, 1, Right).unwrap();
        machine.set_input("").unwrap();

        let result = machine.run();
        assert_eq!(
            result,
            Err(MachineError::NoTransitionDefined {
                state: 0,
                symbol: 0
            })
        );
    }

    #[test]
    fn test_unprocessed_input_is_still_reported() {
        // Halts on the first cell without ever looking at the `2`.
        let mut machine = TuringMachine::new(2, 2).unwrap();
        machine.add_transition(0, 1, 1, 1, Right).unwrap();
        machine.set_input("12").unwrap();

        let output = machine.run().unwrap();
        assert_eq!(machine.tape().head(), 1);
        assert_eq!(machine.tape().read(), 2);
        assert!(output.starts_with("12"));
        assert!(machine.tape().visited_range().contains(&0));
        assert!(machine.tape().visited_range().contains(&1));
    }

    #[test]
    fn test_step_by_step() {
        let mut machine = create_unary_increment();
        machine.set_input("1").unwrap();

        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.tape().head(), 1);
        assert_eq!(machine.step(), Ok(Step::Halt));
        assert_eq!(machine.step(), Ok(Step::Halt));
        assert_eq!(machine.step_count(), 2);
        assert_eq!(machine.output().unwrap(), "11");
    }

    #[test]
    fn test_rerun_starts_from_a_fresh_tape() {
        let mut machine = create_unary_increment();
        machine.set_input("11").unwrap();

        let first = machine.run().unwrap();
        let second = machine.run().unwrap();

        assert_eq!(first, second);
        assert_eq!(machine.step_count(), 3);
    }

    #[test]
    fn test_reset() {
        let mut machine = create_unary_increment();
        machine.set_input("1").unwrap();
        machine.step().unwrap();

        machine.reset();
        assert_eq!(machine.state(), 0);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.tape().head(), 0);
        assert_eq!(machine.output().unwrap(), "10");
    }

    #[test]
    fn test_fresh_instances_are_deterministic() {
        let outputs: Vec<String> = (0..2)
            .map(|_| {
                let mut machine = create_two_state_busy_beaver();
                machine.set_input("").unwrap();
                machine.run().unwrap()
            })
            .collect();

        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn test_strict_rejects_duplicate_key() {
        let mut machine = create_unary_increment();

        let result = machine.add_transition(0, 1, 1, 0, Left);
        assert!(matches!(
            result,
            Err(MachineError::InvalidTransition {
                field: TransitionField::Key,
                ..
            })
        ));
        assert_eq!(machine.transition(0, 1).unwrap().next_state, 0);
    }

    #[test]
    fn test_permissive_duplicate_last_write_wins() {
        let mut machine = TuringMachine::new(2, 1)
            .unwrap()
            .with_mode(ValidationMode::Permissive);
        machine.add_transition(0, 1, 0, 1, Right).unwrap();
        machine.add_transition(0, 1, 1, 0, Left).unwrap();

        assert_eq!(machine.transition_count(), 1);
        assert_eq!(
            machine.transition(0, 1),
            Some(&Transition {
                next_state: 1,
                write: 0,
                direction: Left,
            })
        );
    }

    #[test]
    fn test_state_out_of_range_is_rejected_in_both_modes() {
        for mode in [ValidationMode::Strict, ValidationMode::Permissive] {
            let mut machine = TuringMachine::new(2, 1).unwrap().with_mode(mode);

            let result = machine.add_transition(0, 0, 2, 1, Right);
            assert!(matches!(
                result,
                Err(MachineError::InvalidTransition {
                    field: TransitionField::NextState,
                    ..
                })
            ));

            let result = machine.add_transition(5, 0, 0, 1, Right);
            assert!(matches!(
                result,
                Err(MachineError::InvalidTransition {
                    field: TransitionField::FromState,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_strict_rejects_transition_from_halting_state() {
        let mut machine = TuringMachine::new(2, 1).unwrap();

        let result = machine.add_transition(1, 0, 0, 1, Right);
        assert!(matches!(
            result,
            Err(MachineError::InvalidTransition {
                field: TransitionField::FromState,
                ..
            })
        ));
    }

    #[test]
    fn test_stay_direction() {
        let mut strict = TuringMachine::new(2, 1).unwrap();
        let result = strict.add_transition(0, 0, 1, 1, Stay);
        assert!(matches!(
            result,
            Err(MachineError::InvalidTransition {
                field: TransitionField::Direction,
                ..
            })
        ));

        let mut permissive = TuringMachine::new(2, 1)
            .unwrap()
            .with_mode(ValidationMode::Permissive);
        permissive.add_transition(0, 0, 1, 1, Stay).unwrap();
        permissive.set_input("").unwrap();

        assert_eq!(permissive.run().unwrap(), "1");
        assert_eq!(permissive.tape().head(), 0);
    }

    #[test]
    fn test_strict_rejects_non_digit_input() {
        let mut machine = create_unary_increment();

        let result = machine.set_input("1a1");
        assert_eq!(
            result,
            Err(MachineError::InvalidInput {
                position: 1,
                character: 'a'
            })
        );
    }

    #[test]
    fn test_permissive_coerces_non_digit_input() {
        let mut machine = TuringMachine::new(2, 1)
            .unwrap()
            .with_mode(ValidationMode::Permissive);
        machine.set_input("1x1").unwrap();

        assert_eq!(machine.output().unwrap(), "1010");
    }
}
