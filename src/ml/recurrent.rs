// ============================================================
// Layer 5 — Recurrent Cell (GRU / LSTM)
// ============================================================
// One recurrent cell that walks a whole sequence in one
// direction and returns its final hidden state.
//
// Gate projections are fused: a single Linear maps the input
// to all gates at once (and a second one does the same for the
// hidden state), then the result is sliced per gate.
//
//   GRU  (3 gates, reset applied after the hidden projection)
//     z  = σ(Wz·x + Uz·h)
//     r  = σ(Wr·x + Ur·h)
//     n  = tanh(Wn·x + r ⊙ (Un·h))
//     h' = (1 − z) ⊙ n + z ⊙ h
//
//   LSTM (4 gates)
//     i, f, o = σ(W·x + U·h)      g = tanh(Wg·x + Ug·h)
//     c' = f ⊙ c + i ⊙ g
//     h' = o ⊙ tanh(c')
//
// Dropout is variational: one mask for the layer input and one
// for the recurrent state, sampled once per sequence and reused
// at every step. Masks only exist on an autodiff backend, so
// validation and inference are deterministic.
//
// The input projection for all time steps is computed in one
// batched matmul before the loop; only the hidden projection
// runs per step.

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::{activation, Distribution},
};

use crate::domain::cell_kind::CellKind;

#[derive(Config, Debug)]
pub struct RecurrentCellConfig {
    pub d_input:  usize,
    pub d_hidden: usize,
    #[config(default = "CellKind::Gru")]
    pub kind:     CellKind,
}

impl RecurrentCellConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RecurrentCell<B> {
        let width = self.kind.gates() * self.d_hidden;
        RecurrentCell {
            input_proj:  LinearConfig::new(self.d_input, width).init(device),
            hidden_proj: LinearConfig::new(self.d_hidden, width).init(device),
            d_hidden:    self.d_hidden,
            lstm:        self.kind == CellKind::Lstm,
        }
    }
}

#[derive(Module, Debug)]
pub struct RecurrentCell<B: Backend> {
    pub input_proj:  Linear<B>,
    pub hidden_proj: Linear<B>,
    pub d_hidden:    usize,
    pub lstm:        bool,
}

impl<B: Backend> RecurrentCell<B> {
    /// x: [batch, seq_len, d_input] → final hidden state [batch, d_hidden]
    ///
    /// With `reverse` the sequence is read from the last step to the first.
    pub fn forward(
        &self,
        x:                 Tensor<B, 3>,
        reverse:           bool,
        dropout:           f64,
        recurrent_dropout: f64,
    ) -> Tensor<B, 2> {
        let [batch, seq_len, d_input] = x.dims();
        let device = x.device();

        let x = match dropout_mask::<B>([batch, d_input], dropout, &device) {
            Some(mask) => x * mask.unsqueeze_dim::<3>(1),
            None => x,
        };
        let state_mask = dropout_mask::<B>([batch, self.d_hidden], recurrent_dropout, &device);

        // [batch, seq_len, gates * d_hidden]
        let projected = self.input_proj.forward(x);
        let width     = projected.dims()[2];

        let mut h = Tensor::<B, 2>::zeros([batch, self.d_hidden], &device);
        let mut c = Tensor::<B, 2>::zeros([batch, self.d_hidden], &device);

        for step in 0..seq_len {
            let t = if reverse { seq_len - 1 - step } else { step };

            let gx = projected
                .clone()
                .slice([0..batch, t..t + 1, 0..width])
                .reshape([batch, width]);

            let h_in = match &state_mask {
                Some(mask) => h.clone() * mask.clone(),
                None => h.clone(),
            };
            let gh = self.hidden_proj.forward(h_in);

            if self.lstm {
                (h, c) = self.lstm_step(&gx, &gh, c);
            } else {
                h = self.gru_step(&gx, &gh, h);
            }
        }

        h
    }

    fn gru_step(&self, gx: &Tensor<B, 2>, gh: &Tensor<B, 2>, h: Tensor<B, 2>) -> Tensor<B, 2> {
        let z = activation::sigmoid(self.gate(gx, 0) + self.gate(gh, 0));
        let r = activation::sigmoid(self.gate(gx, 1) + self.gate(gh, 1));
        let n = activation::tanh(self.gate(gx, 2) + r * self.gate(gh, 2));
        // (1 - z) * n + z * h
        n.clone() + z * (h - n)
    }

    fn lstm_step(
        &self,
        gx: &Tensor<B, 2>,
        gh: &Tensor<B, 2>,
        c:  Tensor<B, 2>,
    ) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let i = activation::sigmoid(self.gate(gx, 0) + self.gate(gh, 0));
        let f = activation::sigmoid(self.gate(gx, 1) + self.gate(gh, 1));
        let g = activation::tanh(self.gate(gx, 2) + self.gate(gh, 2));
        let o = activation::sigmoid(self.gate(gx, 3) + self.gate(gh, 3));

        let c = f * c + i * g;
        let h = o * activation::tanh(c.clone());
        (h, c)
    }

    /// Columns of gate `index` in a fused [batch, gates * d_hidden] projection.
    fn gate(&self, fused: &Tensor<B, 2>, index: usize) -> Tensor<B, 2> {
        let [batch, _] = fused.dims();
        let start = index * self.d_hidden;
        fused.clone().slice([0..batch, start..start + self.d_hidden])
    }
}

/// Inverted-dropout mask scaled by 1 / keep, or None outside training.
fn dropout_mask<B: Backend>(
    shape:  [usize; 2],
    prob:   f64,
    device: &B::Device,
) -> Option<Tensor<B, 2>> {
    if !B::ad_enabled() || prob <= 0.0 {
        return None;
    }
    let keep = 1.0 - prob;
    Some(Tensor::random(shape, Distribution::Bernoulli(keep), device).div_scalar(keep))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type B = NdArray;

    fn input(device: &<B as Backend>::Device) -> Tensor<B, 3> {
        // [batch=2, seq_len=4, d_input=3], asymmetric in time
        let values: Vec<f32> = (0..24).map(|v| (v as f32) / 10.0 - 1.0).collect();
        Tensor::<B, 1>::from_floats(values.as_slice(), device).reshape([2, 4, 3])
    }

    #[test]
    fn test_gru_output_shape() {
        let device = Default::default();
        let cell   = RecurrentCellConfig::new(3, 5).init::<B>(&device);
        let out    = cell.forward(input(&device), false, 0.0, 0.0);
        assert_eq!(out.dims(), [2, 5]);
    }

    #[test]
    fn test_lstm_output_shape() {
        let device = Default::default();
        let cell   = RecurrentCellConfig::new(3, 6)
            .with_kind(CellKind::Lstm)
            .init::<B>(&device);
        assert_eq!(cell.input_proj.weight.dims(), [3, 24]);
        let out = cell.forward(input(&device), true, 0.0, 0.0);
        assert_eq!(out.dims(), [2, 6]);
    }

    #[test]
    fn test_direction_matters() {
        let device   = Default::default();
        let cell     = RecurrentCellConfig::new(3, 4).init::<B>(&device);
        let forward  = cell.forward(input(&device), false, 0.0, 0.0);
        let backward = cell.forward(input(&device), true, 0.0, 0.0);
        let diff: f32 = (forward - backward).abs().sum().into_scalar();
        assert!(diff > 0.0);
    }

    #[test]
    fn test_dropout_is_inactive_without_autodiff() {
        let device = Default::default();
        let cell   = RecurrentCellConfig::new(3, 4).init::<B>(&device);
        let a = cell.forward(input(&device), false, 0.5, 0.5);
        let b = cell.forward(input(&device), false, 0.0, 0.0);
        let diff: f32 = (a - b).abs().sum().into_scalar();
        assert_eq!(diff, 0.0);
    }

    #[test]
    fn test_dropout_mask_only_on_autodiff_backend() {
        let device = Default::default();
        assert!(dropout_mask::<B>([2, 3], 0.2, &device).is_none());
        assert!(dropout_mask::<Autodiff<B>>([2, 3], 0.0, &device).is_none());

        let mask = dropout_mask::<Autodiff<B>>([4, 8], 0.5, &device).unwrap();
        // Every entry is either dropped (0) or scaled by 1 / keep (2)
        let values: Vec<f32> = mask.into_data().iter::<f32>().collect();
        assert!(values.iter().all(|&v| v == 0.0 || (v - 2.0).abs() < 1e-6));
    }
}
