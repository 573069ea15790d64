use biosim_data::{ActionOutputs, Brain, NeuronRole, SensorRole};

/// Compute phase: every neuron derives its output from its current inputs.
///
/// Reads only input buffers, so the result does not depend on the order in
/// which neurons are visited.
pub fn compute_outputs<F>(brain: &mut Brain, mut sense: F)
where
    F: FnMut(SensorRole) -> f32,
{
    for neuron in &mut brain.neurons {
        neuron.output = match neuron.role {
            NeuronRole::Sensory(role) => sense(role),
            NeuronRole::Internal(_) => neuron.input_sum().tanh(),
            NeuronRole::Action(_) => neuron.input_sum(),
        };
    }
}

/// Distribute phase: every edge writes `weight * output` into its slot.
///
/// Values land in the next tick's compute, so a self-loop or cycle delays
/// by one tick per hop.
pub fn distribute(brain: &mut Brain) {
    for source in 0..brain.neurons.len() {
        let output = brain.neurons[source].output;
        for e in 0..brain.neurons[source].edges.len() {
            let edge = brain.neurons[source].edges[e];
            brain.neurons[edge.target].inputs[edge.slot] = edge.weight * output;
        }
    }
}

#[must_use]
pub fn action_outputs(brain: &Brain) -> ActionOutputs {
    let mut outputs = ActionOutputs::default();
    for neuron in &brain.neurons {
        if let NeuronRole::Action(role) = neuron.role {
            outputs.set(role, neuron.output);
        }
    }
    outputs
}

/// One full tick of neural activity: compute, then distribute.
pub fn step<F>(brain: &mut Brain, sense: F) -> ActionOutputs
where
    F: FnMut(SensorRole) -> f32,
{
    compute_outputs(brain, sense);
    let outputs = action_outputs(brain);
    distribute(brain);
    outputs
}
