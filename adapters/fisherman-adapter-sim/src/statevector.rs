//! Statevector simulation engine.
//!
//! Amplitude `i` belongs to the basis state whose bit `k` is qubit `k`.
//! Every gate is reduced to one of four kernels: a (multi-)controlled 2×2
//! matrix, a diagonal phase, a controlled swap of two qubits, or a
//! two-qubit Pauli rotation.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

use fisherman_ir::{Circuit, Instruction, InstructionKind, IrError, IrResult, StandardGate};
use num_complex::Complex64;
use rand::Rng;

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Widest circuit [`Statevector::from_circuit`] will simulate (16 GiB of amplitudes).
pub const MAX_STATEVECTOR_QUBITS: usize = 30;

/// A pure quantum state on `num_qubits` qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    ///
    /// Allocates `2^num_qubits` amplitudes; callers bound the width first.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Wrap an explicit amplitude vector.
    ///
    /// Returns `None` unless the length is a power of two. The vector is
    /// used as given; callers are responsible for normalisation.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> Option<Self> {
        if !amplitudes.len().is_power_of_two() {
            return None;
        }
        let num_qubits = amplitudes.len().trailing_zeros() as usize;
        Some(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Simulate `circuit` from |0...0⟩.
    ///
    /// Measurements and barriers are ignored; every gate angle must be bound.
    /// Circuits wider than [`MAX_STATEVECTOR_QUBITS`] are rejected.
    pub fn from_circuit(circuit: &Circuit) -> IrResult<Self> {
        if circuit.num_qubits() > MAX_STATEVECTOR_QUBITS {
            return Err(IrError::TooManyQubits {
                num_qubits: circuit.num_qubits(),
                max: MAX_STATEVECTOR_QUBITS,
            });
        }
        let mut sv = Self::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            sv.apply(inst)?;
        }
        Ok(sv)
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The amplitudes, indexed little-endian by qubit.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Consume the state and return its amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// ⟨self|other⟩.
    ///
    /// States of different width have no overlap and yield zero.
    pub fn inner_product(&self, other: &Statevector) -> Complex64 {
        if self.num_qubits != other.num_qubits {
            return ZERO;
        }
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// Squared norm, 1 for a physical state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Born-rule probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) -> IrResult<()> {
        let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
        match &instruction.kind {
            InstructionKind::Gate(gate) => self.apply_gate(gate, &qubits)?,
            InstructionKind::Reset => self.reset(qubits[0]),
            InstructionKind::Measure | InstructionKind::Barrier => {}
        }
        Ok(())
    }

    /// Apply a gate to specific qubits.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) -> IrResult<()> {
        use StandardGate as G;

        let angle = |i: usize| gate.parameters()[i].evaluate();
        match gate {
            G::CX | G::CY | G::CZ | G::CH | G::CRx(_) | G::CRy(_) | G::CRz(_) | G::CP(_) => {
                let target = single_qubit_matrix(&controlled_base(gate))?;
                self.apply_controlled(&qubits[..1], qubits[1], target);
            }
            G::CCX => self.apply_controlled(&qubits[..2], qubits[2], pauli_x()),
            G::Swap => self.apply_swap(None, qubits[0], qubits[1]),
            G::CSwap => self.apply_swap(Some(qubits[0]), qubits[1], qubits[2]),
            G::RXX(_) => self.apply_pauli_rotation(qubits[0], qubits[1], angle(0)?, 1.0),
            G::RYY(_) => self.apply_pauli_rotation(qubits[0], qubits[1], angle(0)?, -1.0),
            G::RZZ(_) => {
                let (a, b) = (1 << qubits[0], 1 << qubits[1]);
                let half = angle(0)? / 2.0;
                let same = Complex64::from_polar(1.0, -half);
                let diff = Complex64::from_polar(1.0, half);
                self.apply_diagonal(|i| if (i & a == 0) == (i & b == 0) { same } else { diff });
            }
            single => self.apply_controlled(&[], qubits[0], single_qubit_matrix(single)?),
        }
        Ok(())
    }

    /// Apply `matrix` to `target` on the subspace where every control is 1.
    fn apply_controlled(&mut self, controls: &[usize], target: usize, matrix: Matrix2) {
        let ctrl_mask = controls.iter().fold(0, |m, &c| m | (1 << c));
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & ctrl_mask == ctrl_mask && i & tgt_mask == 0 {
                let j = i | tgt_mask;
                let (a, b) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = matrix[0][0] * a + matrix[0][1] * b;
                self.amplitudes[j] = matrix[1][0] * a + matrix[1][1] * b;
            }
        }
    }

    fn apply_diagonal(&mut self, phase: impl Fn(usize) -> Complex64) {
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= phase(i);
        }
    }

    fn apply_swap(&mut self, control: Option<usize>, q1: usize, q2: usize) {
        let ctrl_mask = control.map_or(0, |c| 1 << c);
        let (m1, m2) = (1 << q1, 1 << q2);
        for i in 0..self.amplitudes.len() {
            if i & ctrl_mask == ctrl_mask && i & m1 != 0 && i & m2 == 0 {
                self.amplitudes.swap(i, (i & !m1) | m2);
            }
        }
    }

    /// exp(-iθ/2 P⊗P) for P ∈ {X, Y}.
    ///
    /// P⊗P maps each basis state to its partner with both bits flipped,
    /// scaled by `same_parity` when the two bits agree and by 1 otherwise
    /// (`1.0` for XX, `-1.0` for YY).
    fn apply_pauli_rotation(&mut self, q1: usize, q2: usize, theta: f64, same_parity: f64) {
        let (m1, m2) = (1 << q1, 1 << q2);
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & m1 == 0 {
                let j = i ^ (m1 | m2);
                let f = if i & m2 == 0 { same_parity } else { 1.0 };
                let coupling = Complex64::new(0.0, -s * f);
                let (a, b) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = c * a + coupling * b;
                self.amplitudes[j] = c * b + coupling * a;
            }
        }
    }

    /// Project `qubit` onto |0⟩ folding the |1⟩ branch in, then renormalise.
    fn reset(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask != 0 {
                let moved = std::mem::replace(&mut self.amplitudes[i], ZERO);
                self.amplitudes[i & !mask] += moved;
            }
        }
        let norm = self.norm_sqr().sqrt();
        if norm > 0.0 {
            for amp in &mut self.amplitudes {
                *amp /= norm;
            }
        }
    }

    /// Draw `shots` basis-state indices from the Born distribution.
    pub fn sample_many<R: Rng>(&self, rng: &mut R, shots: u32) -> Vec<usize> {
        let cumulative: Vec<f64> = self
            .amplitudes
            .iter()
            .scan(0.0, |acc, amp| {
                *acc += amp.norm_sqr();
                Some(*acc)
            })
            .collect();
        let total = cumulative.last().copied().unwrap_or(0.0);
        let last = self.amplitudes.len() - 1;

        (0..shots)
            .map(|_| {
                let r = rng.gen_range(0.0..1.0) * total;
                cumulative.partition_point(|&c| c <= r).min(last)
            })
            .collect()
    }

    /// Draw a single basis-state index.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        self.sample_many(rng, 1)[0]
    }

    /// Convert measurement outcome to bitstring (character `k` is qubit `k`).
    pub fn outcome_to_bitstring(&self, outcome: usize) -> String {
        (0..self.num_qubits)
            .map(|k| if (outcome >> k) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

/// The single-qubit gate a controlled gate applies to its target.
fn controlled_base(gate: &StandardGate) -> StandardGate {
    use StandardGate as G;
    match gate {
        G::CX => G::X,
        G::CY => G::Y,
        G::CZ => G::Z,
        G::CH => G::H,
        G::CRx(t) => G::Rx(t.clone()),
        G::CRy(t) => G::Ry(t.clone()),
        G::CRz(t) => G::Rz(t.clone()),
        G::CP(t) => G::P(t.clone()),
        other => other.clone(),
    }
}

fn pauli_x() -> Matrix2 {
    [[ZERO, ONE], [ONE, ZERO]]
}

fn diag(phase: f64) -> Matrix2 {
    [[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, phase)]]
}

/// 2×2 unitary of a single-qubit gate.
fn single_qubit_matrix(gate: &StandardGate) -> IrResult<Matrix2> {
    use StandardGate as G;

    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    let sx_p = Complex64::new(0.5, 0.5);
    let sx_m = Complex64::new(0.5, -0.5);

    Ok(match gate {
        G::I => [[ONE, ZERO], [ZERO, ONE]],
        G::X => pauli_x(),
        G::Y => [[ZERO, -I], [I, ZERO]],
        G::Z => [[ONE, ZERO], [ZERO, -ONE]],
        G::H => [[h, h], [h, -h]],
        G::S => diag(FRAC_PI_2),
        G::Sdg => diag(-FRAC_PI_2),
        G::T => diag(FRAC_PI_4),
        G::Tdg => diag(-FRAC_PI_4),
        G::SX => [[sx_p, sx_m], [sx_m, sx_p]],
        G::SXdg => [[sx_m, sx_p], [sx_p, sx_m]],
        G::Rx(t) => {
            let t = t.evaluate()?;
            let (c, s) = ((t / 2.0).cos(), (t / 2.0).sin());
            let nis = Complex64::new(0.0, -s);
            [[c.into(), nis], [nis, c.into()]]
        }
        G::Ry(t) => {
            let t = t.evaluate()?;
            let (c, s) = ((t / 2.0).cos(), (t / 2.0).sin());
            [[c.into(), (-s).into()], [s.into(), c.into()]]
        }
        G::Rz(t) => {
            let t = t.evaluate()?;
            [
                [Complex64::from_polar(1.0, -t / 2.0), ZERO],
                [ZERO, Complex64::from_polar(1.0, t / 2.0)],
            ]
        }
        G::P(t) => diag(t.evaluate()?),
        G::U(theta, phi, lambda) => {
            let (t, p, l) = (theta.evaluate()?, phi.evaluate()?, lambda.evaluate()?);
            let (c, s) = ((t / 2.0).cos(), (t / 2.0).sin());
            [
                [c.into(), -Complex64::from_polar(s, l)],
                [Complex64::from_polar(s, p), Complex64::from_polar(c, p + l)],
            ]
        }
        other => {
            return Err(IrError::QubitCountMismatch {
                gate_name: other.name().to_string(),
                expected: other.num_qubits(),
                got: 1,
            });
        }
    })
}
